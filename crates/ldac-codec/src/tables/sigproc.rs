//! 定点信号处理常量表.
//!
//! 窗函数为 Q30, 旋转因子为 Q31, 量化相关表的 Q 格式见各表注释.
//! 表按变换长度分为 1fs (128 点) 与 2fs (256 点) 两组.

/// MDCT 分析窗 (1fs, Q30)
pub const FWIN_1FS: [i32; 128] = [
    40425, 363792, 1010330, 1979651, 3271171, 4884110, 6817499, 9070172,
    11640773, 14527753, 17729372, 21243703, 25068629, 29201845, 33640862, 38383006,
    43425420, 48765068, 54398732, 60323019, 66534362, 73029017, 79803073, 86852450,
    94172901, 101760017, 109609227, 117715804, 126074864, 134681373, 143530145, 152615851,
    161933018, 171476034, 181239149, 191216484, 201402029, 211789647, 222373082, 233145959,
    244101788, 255233971, 266535801, 278000471, 289621074, 301390612, 313301994, 325348046,
    337521511, 349815057, 362221279, 374732703, 387341792, 400040953, 412822535, 425678839,
    438602120, 451584596, 464618444, 477695815, 490808831, 503949592, 517110185, 530282680,
    543459144, 556631639, 569792232, 582932993, 596046009, 609123380, 622157228, 635139704,
    648062985, 660919289, 673700871, 686400032, 699009121, 711520545, 723926767, 736220313,
    748393778, 760439830, 772351212, 784120750, 795741353, 807206023, 818507853, 829640036,
    840595865, 851368742, 861952177, 872339795, 882525340, 892502675, 902265790, 911808806,
    921125973, 930211679, 939060451, 947666960, 956026020, 964132597, 971981807, 979568923,
    986889374, 993938751, 1000712807, 1007207462, 1013418805, 1019343092, 1024976756, 1030316404,
    1035358818, 1040100962, 1044539979, 1048673195, 1052498121, 1056012452, 1059214071, 1062101051,
    1064671652, 1066924325, 1068857714, 1070470653, 1071762173, 1072731494, 1073378032, 1073701399,
];

/// IMDCT 合成窗 (1fs, Q30)
pub const BWIN_1FS: [i32; 128] = [
    40428, 364039, 1012234, 1986964, 3291163, 4928745, 6904621, 9224703,
    11895911, 14926191, 18324521, 22100923, 26266480, 30833342, 35814737, 41224983,
    47079488, 53394756, 60188379, 67479033, 75286457, 83631429, 92535727, 102022079,
    112114099, 122836198, 134213487, 146271640, 159036745, 172535117, 186793076, 201836695,
    217691496, 234382118, 251931918, 270362543, 289693435, 309941295, 331119489, 353237408,
    376299791, 400305998, 425249266, 451115947, 477884750, 505526005, 534000970, 563261208,
    593248079, 623892344, 655113953, 686822021, 718915033, 751281299, 783799690, 816340645,
    848767474, 880937922, 912705988, 943923959, 974444600, 1004123447, 1032821133, 1060405673,
    1086754633, 1111757102, 1135315413, 1157346552, 1177783206, 1196574442, 1213685987, 1229100127,
    1242815259, 1254845098, 1265217628, 1273973816, 1281166161, 1286857136, 1291117571, 1294025036,
    1295662257, 1296115613, 1295473739, 1293826251, 1291262613, 1287871152, 1283738221, 1278947503,
    1273579463, 1267710911, 1261414700, 1254759516, 1247809757, 1240625501, 1233262527, 1225772395,
    1218202568, 1210596569, 1202994159, 1195431535, 1187941538, 1180553870, 1173295305, 1166189911,
    1159259251, 1152522596, 1145997109, 1139698037, 1133638887, 1127831583, 1122286626, 1117013234,
    1112019471, 1107312374, 1102898058, 1098781818, 1094968225, 1091461204, 1088264112, 1085379801,
    1082810680, 1080558767, 1078625730, 1077012933, 1075721462, 1074752153, 1074105616, 1073782249,
];

/// 蝶形旋转余弦 (1fs, Q31)
pub const WCOS_1FS: [i32; 128] = [
    1518500250, 1984016189, -821806413, 2106220352, 1193077991, -418953276, -1785567396, 2137142927,
    1893911494, 1362349204, 623381598, -210490206, -1012316784, -1660027308, -2055013723, 2144896910,
    2083126254, 1941302225, 1724875040, 1442161874, 1104027237, 723465451, 315101295, -105372028,
    -521795963, -918167572, -1279254516, -1591180426, -1841958164, -2021950484, -2124240380, 2146836866,
    2131333572, 2095304370, 2039096241, 1963250501, 1868497586, 1755750017, 1626093616, 1480777044,
    1321199781, 1148898640, 965532978, 772868706, 572761285, 367137861, 157978697, -52701887,
    -262874923, -470516330, -673626408, -870249095, -1058490808, -1236538675, -1402678000, -1555308768,
    -1692961062, -1814309216, -1918184581, -2003586779, -2069693342, -2115867626, -2141664948, 2147443222,
    2146473080, 2144209982, 2140655293, 2135811153, 2129680480, 2122266967, 2113575080, 2103610054,
    2092377892, 2079885360, 2066139983, 2051150040, 2034924562, 2017473321, 1998806829, 1978936331,
    1957873796, 1935631910, 1912224073, 1887664383, 1861967634, 1835149306, 1807225553, 1778213194,
    1748129707, 1716993211, 1684822463, 1651636841, 1617456335, 1582301533, 1546193612, 1509154322,
    1471205974, 1432371426, 1392674072, 1352137822, 1310787095, 1268646800, 1225742318, 1182099496,
    1137744621, 1092704411, 1047005996, 1000676905, 953745043, 906238681, 858186435, 809617249,
    760560380, 711045377, 661102068, 610760536, 560051104, 509004318, 457650927, 406021865,
    354148230, 302061269, 249792358, 197372981, 144834714, 92209205, 39528151, 0,
];

/// 蝶形旋转正弦 (1fs, Q31)
pub const WSIN_1FS: [i32; 128] = [
    1518500250, 821806413, 1984016189, 418953276, 1785567396, 2106220352, 1193077991, 210490206,
    1012316784, 1660027308, 2055013723, 2137142927, 1893911494, 1362349204, 623381598, 105372028,
    521795963, 918167572, 1279254516, 1591180426, 1841958164, 2021950484, 2124240380, 2144896910,
    2083126254, 1941302225, 1724875040, 1442161874, 1104027237, 723465451, 315101295, 52701887,
    262874923, 470516330, 673626408, 870249095, 1058490808, 1236538675, 1402678000, 1555308768,
    1692961062, 1814309216, 1918184581, 2003586779, 2069693342, 2115867626, 2141664948, 2146836866,
    2131333572, 2095304370, 2039096241, 1963250501, 1868497586, 1755750017, 1626093616, 1480777044,
    1321199781, 1148898640, 965532978, 772868706, 572761285, 367137861, 157978697, 13176712,
    65873638, 118530885, 171116733, 223599506, 275947592, 328129457, 380113669, 431868915,
    483364019, 534567963, 585449903, 635979190, 686125387, 735858287, 785147934, 833964638,
    882278992, 930061894, 977284562, 1023918550, 1069935768, 1115308496, 1160009405, 1204011567,
    1247288478, 1289814068, 1331562723, 1372509294, 1412629117, 1451898025, 1490292364, 1527789007,
    1564365367, 1599999411, 1634669676, 1668355276, 1701035922, 1732691928, 1763304224, 1792854372,
    1821324572, 1848697674, 1874957189, 1900087301, 1924072871, 1946899451, 1968553292, 1989021350,
    2008291295, 2026351522, 2043191150, 2058800036, 2073168777, 2086288720, 2098151960, 2108751352,
    2118080511, 2126133817, 2132906420, 2138394240, 2142593971, 2145503083, 2147119825, 0,
];

/// 位反转置换 (1fs)
pub const PERM_1FS: [u16; 128] = [
    0, 64, 96, 32, 48, 112, 80, 16, 24, 88, 120, 56, 40, 104, 72, 8,
    12, 76, 108, 44, 60, 124, 92, 28, 20, 84, 116, 52, 36, 100, 68, 4,
    6, 70, 102, 38, 54, 118, 86, 22, 30, 94, 126, 62, 46, 110, 78, 14,
    10, 74, 106, 42, 58, 122, 90, 26, 18, 82, 114, 50, 34, 98, 66, 2,
    3, 67, 99, 35, 51, 115, 83, 19, 27, 91, 123, 59, 43, 107, 75, 11,
    15, 79, 111, 47, 63, 127, 95, 31, 23, 87, 119, 55, 39, 103, 71, 7,
    5, 69, 101, 37, 53, 117, 85, 21, 29, 93, 125, 61, 45, 109, 77, 13,
    9, 73, 105, 41, 57, 121, 89, 25, 17, 81, 113, 49, 33, 97, 65, 1,
];

/// MDCT 分析窗 (2fs, Q30)
pub const FWIN_2FS: [i32; 256] = [
    10106, 90956, 252642, 495141, 818416, 1222419, 1707089, 2272352,
    2918124, 3644307, 4450792, 5337458, 6304170, 7350784, 8477142, 9683074,
    10968399, 12332922, 13776439, 15298732, 16899572, 18578718, 20335916, 22170903,
    24083402, 26073125, 28139772, 30283032, 32502582, 34798088, 37169205, 39615575,
    42136829, 44732589, 47402463, 50146049, 52962934, 55852694, 58814894, 61849087,
    64954816, 68131615, 71379003, 74696494, 78083585, 81539769, 85064524, 88657319,
    92317613, 96044856, 99838485, 103697930, 107622609, 111611931, 115665296, 119782093,
    123961702, 128203493, 132506828, 136871059, 141295529, 145779570, 150322509, 154923660,
    159582331, 164297821, 169069418, 173896406, 178778055, 183713633, 188702394, 193743588,
    198836456, 203980231, 209174138, 214417395, 219709212, 225048793, 230435332, 235868020,
    241346038, 246868561, 252434757, 258043788, 263694809, 269386970, 275119413, 280891275,
    286701686, 292549772, 298434651, 304355438, 310311242, 316301164, 322324303, 328379753,
    334466600, 340583928, 346730817, 352906340, 359109568, 365339565, 371595395, 377876115,
    384180778, 390508436, 396858136, 403228921, 409619832, 416029907, 422458180, 428903683,
    435365446, 441842495, 448333855, 454838548, 461355595, 467884014, 474422823, 480971035,
    487527667, 494091729, 500662233, 507238191, 513818611, 520402502, 526988874, 533576734,
    540165090, 546752950, 553339322, 559923213, 566503633, 573079591, 579650095, 586214157,
    592770789, 599319001, 605857810, 612386229, 618903276, 625407969, 631899329, 638376378,
    644838141, 651283644, 657711917, 664121992, 670512903, 676883688, 683233388, 689561046,
    695865709, 702146429, 708402259, 714632256, 720835484, 727011007, 733157896, 739275224,
    745362071, 751417521, 757440660, 763430582, 769386386, 775307173, 781192052, 787040138,
    792850549, 798622411, 804354854, 810047015, 815698036, 821307067, 826873263, 832395786,
    837873804, 843306492, 848693031, 854032612, 859324429, 864567686, 869761593, 874905368,
    879998236, 885039430, 890028191, 894963769, 899845418, 904672406, 909444003, 914159493,
    918818164, 923419315, 927962254, 932446295, 936870765, 941234996, 945538331, 949780122,
    953959731, 958076528, 962129893, 966119215, 970043894, 973903339, 977696968, 981424211,
    985084505, 988677300, 992202055, 995658239, 999045330, 1002362821, 1005610209, 1008787008,
    1011892737, 1014926930, 1017889130, 1020778890, 1023595775, 1026339361, 1029009235, 1031604995,
    1034126249, 1036572619, 1038943736, 1041239242, 1043458792, 1045602052, 1047668699, 1049658422,
    1051570921, 1053405908, 1055163106, 1056842252, 1058443092, 1059965385, 1061408902, 1062773425,
    1064058750, 1065264682, 1066391040, 1067437654, 1068404366, 1069291032, 1070097517, 1070823700,
    1071469472, 1072034735, 1072519405, 1072923408, 1073246683, 1073489182, 1073650868, 1073731718,
];

/// IMDCT 合成窗 (2fs, Q30)
pub const BWIN_2FS: [i32; 256] = [
    10107, 90971, 252761, 495598, 819665, 1225206, 1712525, 2281990,
    2934028, 3669129, 4487843, 5390785, 6378631, 7452119, 8612052, 9859294,
    11194774, 12619485, 14134485, 15740895, 17439903, 19232762, 21120790, 23105373,
    25187961, 27370075, 29653299, 32039287, 34529761, 37126511, 39831393, 42646334,
    45573329, 48614440, 51771799, 55047604, 58444124, 61963693, 65608711, 69381647,
    73285035, 77321471, 81493617, 85804195, 90255988, 94851840, 99594647, 104487362,
    109532990, 114734584, 120095241, 125618102, 131306345, 137163180, 143191849, 149395614,
    155777755, 162341564, 169090339, 176027371, 183155942, 190479316, 198000726, 205723366,
    213650382, 221784856, 230129801, 238688141, 247462702, 256456196, 265671203, 275110162,
    284775347, 294668851, 304792571, 315148185, 325737134, 336560599, 347619484, 358914388,
    370445588, 382213013, 394216221, 406454375, 418926221, 431630061, 444563733, 457724584,
    471109448, 484714625, 498535857, 512568308, 526806546, 541244522, 555875558, 570692325,
    585686842, 600850456, 616173839, 631646986, 647259211, 662999151, 678854772, 694813379,
    710861631, 726985559, 743170586, 759401561, 775662783, 791938042, 808210658, 824463527,
    840679167, 856839776, 872927284, 888923418, 904809763, 920567829, 936179119, 951625203,
    966887784, 981948779, 996790384, 1011395151, 1025746060, 1039826587, 1053620773, 1067113292,
    1080289508, 1093135537, 1105638300, 1117785572, 1129566027, 1140969274, 1151985897, 1162607471,
    1172826595, 1182636897, 1192033051, 1201010772, 1209566820, 1217698986, 1225406081, 1232687911,
    1239545261, 1245979856, 1251994336, 1257592214, 1262777836, 1267556341, 1271933612, 1275916230,
    1279511423, 1282727021, 1285571399, 1288053430, 1290182433, 1291968123, 1293420560, 1294550104,
    1295367362, 1295883149, 1296108440, 1296054329, 1295731990, 1295152638, 1294327494, 1293267754,
    1291984553, 1290488943, 1288791862, 1286904113, 1284836338, 1282599007, 1280202390, 1277656552,
    1274971331, 1272156332, 1269220918, 1266174196, 1263025017, 1259781969, 1256453370, 1253047272,
    1249571454, 1246033425, 1242440426, 1238799427, 1235117135, 1231399992, 1227654185, 1223885643,
    1220100050, 1216302843, 1212499223, 1208694157, 1204892387, 1201098435, 1197316610, 1193551015,
    1189805553, 1186083934, 1182389681, 1178726140, 1175096482, 1171503713, 1167950679, 1164440074,
    1160974444, 1157556195, 1154187599, 1150870800, 1147607818, 1144400558, 1141250812, 1138160266,
    1135130504, 1132163017, 1129259201, 1126420368, 1123647746, 1120942485, 1118305663, 1115738286,
    1113241295, 1110815569, 1108461925, 1106181127, 1103973886, 1101840863, 1099782672, 1097799883,
    1095893025, 1094062588, 1092309026, 1090632756, 1089034165, 1087513609, 1086071416, 1084707886,
    1083423294, 1082217893, 1081091910, 1080045555, 1079079015, 1078192462, 1077386046, 1076659905,
    1076014156, 1075448904, 1074964240, 1074560239, 1074236965, 1073994466, 1073832780, 1073751930,
];

/// 蝶形旋转余弦 (2fs, Q31)
pub const WCOS_2FS: [i32; 256] = [
    1518500250, 1984016189, -821806413, 2106220352, 1193077991, -418953276, -1785567396, 2137142927,
    1893911494, 1362349204, 623381598, -210490206, -1012316784, -1660027308, -2055013723, 2144896910,
    2083126254, 1941302225, 1724875040, 1442161874, 1104027237, 723465451, 315101295, -105372028,
    -521795963, -918167572, -1279254516, -1591180426, -1841958164, -2021950484, -2124240380, 2146836866,
    2131333572, 2095304370, 2039096241, 1963250501, 1868497586, 1755750017, 1626093616, 1480777044,
    1321199781, 1148898640, 965532978, 772868706, 572761285, 367137861, 157978697, -52701887,
    -262874923, -470516330, -673626408, -870249095, -1058490808, -1236538675, -1402678000, -1555308768,
    -1692961062, -1814309216, -1918184581, -2003586779, -2069693342, -2115867626, -2141664948, 2147321946,
    2143442326, 2134398966, 2120213651, 2100920556, 2076566160, 2047209133, 2012920201, 1973781967,
    1929888720, 1881346202, 1828271356, 1770792044, 1709046739, 1643184191, 1573363068, 1499751576,
    1422527051, 1341875533, 1257991320, 1171076495, 1081340445, 988999351, 894275671, 797397602,
    698598533, 598116479, 496193509, 393075166, 289009871, 184248325, 79042909, -26352928,
    -131685278, -236700388, -341145265, -444768294, -547319836, -648552838, -748223418, -846091463,
    -941921200, -1035481766, -1126547765, -1214899813, -1300325060, -1382617710, -1461579514, -1537020244,
    -1608758157, -1676620432, -1740443581, -1800073849, -1855367581, -1906191570, -1952423377, -1993951625,
    -2030676269, -2062508835, -2089372638, -2111202959, -2127947206, -2139565043, -2146028480, 2147473542,
    2147230991, 2146665076, 2145775880, 2144563539, 2143028234, 2141170197, 2138989708, 2136487095,
    2133662734, 2130517052, 2127050522, 2123263666, 2119157054, 2114731305, 2109987085, 2104925109,
    2099546139, 2093850985, 2087840505, 2081515603, 2074877233, 2067926394, 2060664133, 2053091544,
    2045209767, 2037019988, 2028523442, 2019721407, 2010615210, 2001206222, 1991495860, 1981485585,
    1971176906, 1960571375, 1949670589, 1938476190, 1926989864, 1915213340, 1903148392, 1890796837,
    1878160535, 1865241388, 1852041343, 1838562388, 1824806552, 1810775906, 1796472565, 1781898681,
    1767056450, 1751948107, 1736575927, 1720942225, 1705049355, 1688899711, 1672495725, 1655839867,
    1638934646, 1621782608, 1604386335, 1586748447, 1568871601, 1550758488, 1532411837, 1513834411,
    1495029006, 1475998456, 1456745625, 1437273414, 1417584755, 1397682613, 1377569986, 1357249901,
    1336725419, 1315999631, 1295075659, 1273956653, 1252645794, 1231146291, 1209461382, 1187594332,
    1165548435, 1143327011, 1120933406, 1098370993, 1075643169, 1052753357, 1029705004, 1006501581,
    983146583, 959643527, 935995952, 912207419, 888281512, 864221832, 840032004, 815715670,
    791276492, 766718151, 742044345, 717258790, 692365218, 667367379, 642269036, 617073971,
    591785976, 566408860, 540946445, 515402566, 489781069, 464085813, 438320667, 412489512,
    386596237, 360644742, 334638936, 308582734, 282480061, 256334847, 230151030, 203932553,
    177683365, 151407418, 125108670, 98791081, 72458615, 46115236, 19764913, 0,
];

/// 蝶形旋转正弦 (2fs, Q31)
pub const WSIN_2FS: [i32; 256] = [
    1518500250, 821806413, 1984016189, 418953276, 1785567396, 2106220352, 1193077991, 210490206,
    1012316784, 1660027308, 2055013723, 2137142927, 1893911494, 1362349204, 623381598, 105372028,
    521795963, 918167572, 1279254516, 1591180426, 1841958164, 2021950484, 2124240380, 2144896910,
    2083126254, 1941302225, 1724875040, 1442161874, 1104027237, 723465451, 315101295, 52701887,
    262874923, 470516330, 673626408, 870249095, 1058490808, 1236538675, 1402678000, 1555308768,
    1692961062, 1814309216, 1918184581, 2003586779, 2069693342, 2115867626, 2141664948, 2146836866,
    2131333572, 2095304370, 2039096241, 1963250501, 1868497586, 1755750017, 1626093616, 1480777044,
    1321199781, 1148898640, 965532978, 772868706, 572761285, 367137861, 157978697, 26352928,
    131685278, 236700388, 341145265, 444768294, 547319836, 648552838, 748223418, 846091463,
    941921200, 1035481766, 1126547765, 1214899813, 1300325060, 1382617710, 1461579514, 1537020244,
    1608758157, 1676620432, 1740443581, 1800073849, 1855367581, 1906191570, 1952423377, 1993951625,
    2030676269, 2062508835, 2089372638, 2111202959, 2127947206, 2139565043, 2146028480, 2147321946,
    2143442326, 2134398966, 2120213651, 2100920556, 2076566160, 2047209133, 2012920201, 1973781967,
    1929888720, 1881346202, 1828271356, 1770792044, 1709046739, 1643184191, 1573363068, 1499751576,
    1422527051, 1341875533, 1257991320, 1171076495, 1081340445, 988999351, 894275671, 797397602,
    698598533, 598116479, 496193509, 393075166, 289009871, 184248325, 79042909, 6588387,
    32940695, 59288042, 85626460, 111951983, 138260647, 164548489, 190811551, 217045878,
    243247518, 269412525, 295536961, 321616889, 347648383, 373627523, 399550396, 425413098,
    451211734, 476942419, 502601279, 528184449, 553688076, 579108320, 604441352, 629683357,
    654830535, 679879097, 704825272, 729665303, 754395449, 779011986, 803511207, 827889422,
    852142959, 876268167, 900261413, 924119082, 947837582, 971413342, 994842810, 1018122458,
    1041248781, 1064218296, 1087027544, 1109673089, 1132151521, 1154459456, 1176593533, 1198550419,
    1220326809, 1241919421, 1263325005, 1284540337, 1305562222, 1326387494, 1347013017, 1367435685,
    1387652422, 1407660183, 1427455956, 1447036760, 1466399645, 1485541696, 1504460029, 1523151797,
    1541614183, 1559844408, 1577839726, 1595597428, 1613114838, 1630389319, 1647418269, 1664199124,
    1680729357, 1697006479, 1713028037, 1728791620, 1744294853, 1759535401, 1774510970, 1789219305,
    1803658189, 1817825449, 1831718951, 1845336604, 1858676355, 1871736196, 1884514161, 1897008325,
    1909216806, 1921137767, 1932769411, 1944109987, 1955157788, 1965911148, 1976368450, 1986528118,
    1996388622, 2005948478, 2015206245, 2024160529, 2032809982, 2041153301, 2049189231, 2056916560,
    2064334124, 2071440808, 2078235540, 2084717298, 2090885105, 2096738032, 2102275199, 2107495770,
    2112398960, 2116984031, 2121250292, 2125197100, 2128823862, 2132130030, 2135115107, 2137778644,
    2140120240, 2142139541, 2143836244, 2145210092, 2146260881, 2146988450, 2147392690, 0,
];

/// 位反转置换 (2fs)
pub const PERM_2FS: [u16; 256] = [
    0, 128, 192, 64, 96, 224, 160, 32, 48, 176, 240, 112, 80, 208, 144, 16,
    24, 152, 216, 88, 120, 248, 184, 56, 40, 168, 232, 104, 72, 200, 136, 8,
    12, 140, 204, 76, 108, 236, 172, 44, 60, 188, 252, 124, 92, 220, 156, 28,
    20, 148, 212, 84, 116, 244, 180, 52, 36, 164, 228, 100, 68, 196, 132, 4,
    6, 134, 198, 70, 102, 230, 166, 38, 54, 182, 246, 118, 86, 214, 150, 22,
    30, 158, 222, 94, 126, 254, 190, 62, 46, 174, 238, 110, 78, 206, 142, 14,
    10, 138, 202, 74, 106, 234, 170, 42, 58, 186, 250, 122, 90, 218, 154, 26,
    18, 146, 210, 82, 114, 242, 178, 50, 34, 162, 226, 98, 66, 194, 130, 2,
    3, 131, 195, 67, 99, 227, 163, 35, 51, 179, 243, 115, 83, 211, 147, 19,
    27, 155, 219, 91, 123, 251, 187, 59, 43, 171, 235, 107, 75, 203, 139, 11,
    15, 143, 207, 79, 111, 239, 175, 47, 63, 191, 255, 127, 95, 223, 159, 31,
    23, 151, 215, 87, 119, 247, 183, 55, 39, 167, 231, 103, 71, 199, 135, 7,
    5, 133, 197, 69, 101, 229, 165, 37, 53, 181, 245, 117, 85, 213, 149, 21,
    29, 157, 221, 93, 125, 253, 189, 61, 45, 173, 237, 109, 77, 205, 141, 13,
    9, 137, 201, 73, 105, 233, 169, 41, 57, 185, 249, 121, 89, 217, 153, 25,
    17, 145, 209, 81, 113, 241, 177, 49, 33, 161, 225, 97, 65, 193, 129, 1,
];

/// 归一化比例因子 (Q15)
pub const SF: [i32; 32] = [
    1, 2, 4, 8, 16, 32, 64, 128,
    256, 512, 1024, 2048, 4096, 8192, 16384, 32768,
    65536, 131072, 262144, 524288, 1048576, 2097152, 4194304, 8388608,
    16777216, 33554432, 67108864, 134217728, 268435456, 536870912, 1073741824, 2147483647,
];

/// 量化因子 (Q16)
pub const QF: [i32; 16] = [
    32768, 98304, 229376, 491520, 1015808, 2064384, 4161536, 8355840,
    16744448, 33521664, 67076096, 134184960, 268402688, 536838144, 1073709056, 2147450880,
];

/// 反量化因子 (Q31)
pub const IQF: [i32; 16] = [
    -2147483648, 1431655765, 613566757, 286331153, 138547332, 68174084, 33818640, 16843009,
    8405024, 4198404, 2098177, 1048832, 524352, 262160, 131076, 65537,
];

/// 残差归一化逆比例 (Q15)
pub const IRSF: [i32; 16] = [
    32640, 97920, 228480, 489600, 1011840, 2056320, 4145280, 8323200,
    16679040, 33390720, 66814080, 133660800, 267354240, 534741120, 1069514880, 2139062400,
];

/// 残差归一化比例 (Q31)
pub const RSF: [i32; 16] = [
    -2147483648, 715827883, 306783378, 143165577, 69273666, 34087042, 16909320, 8421505,
    4202512, 2099202, 1049088, 524416, 262176, 131080, 65538, 32769,
];
